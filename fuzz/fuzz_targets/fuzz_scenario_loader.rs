#![no_main]

use libfuzzer_sys::fuzz_target;
use netscen::ScenarioLoader;

fuzz_target!(|data: &[u8]| {
    let Ok(yaml) = std::str::from_utf8(data) else {
        return;
    };

    // Any input must yield a scenario or an error, never a panic
    if let Ok(result) = ScenarioLoader::with_defaults().load_from_str(yaml) {
        let scenario = result.scenario;
        let _ = scenario.summary();
        let _ = scenario.address_space();
        for host in scenario.hosts().values() {
            let _ = scenario.applicable_exploits(host).count();
        }
    }
});
