#![no_main]

use libfuzzer_sys::fuzz_target;

// Fuzz target: server-side request parsing.
fuzz_target!(|data: &[u8]| {
    if let Ok(request) = bps_types::QueryRequest::from_json(data) {
        let planes = bps_types::choose_planes(request.planes);
        assert!(planes.len() >= bps_types::plane::MANDATORY_PLANES.len());
        assert!(planes.windows(2).all(|w| w[0] < w[1]));
    }
});
