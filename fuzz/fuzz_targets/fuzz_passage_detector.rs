//! Fuzz target: `PassageDetector::on_sample`
//!
//! Treats the input as a stream of (time step, distance, roll) triples and
//! feeds them to the detector.  It must never panic, and while a passage
//! is open its start time must never lie in the future.
//!
//! cargo fuzz run fuzz_passage_detector

#![no_main]

use libfuzzer_sys::fuzz_target;
use rgb_portal::app::ports::TriggerRoll;
use rgb_portal::config::PortalConfig;
use rgb_portal::detector::PassageDetector;
use rgb_portal::fsm::PortalMode;
use rgb_portal::sensors::DistanceSampler;
use rgb_portal::time::Millis;

struct ByteRoll(u8);

impl TriggerRoll for ByteRoll {
    fn roll_percent(&mut self) -> u8 {
        self.0 % 100
    }
}

fuzz_target!(|data: &[u8]| {
    let config = PortalConfig::default();
    let sampler = DistanceSampler::new(&config);
    let start = Millis(u32::MAX - 4_000);
    let mut detector = PassageDetector::new(&config, start);
    let mut now = start;

    for chunk in data.chunks_exact(3) {
        now = now.after(u32::from(chunk[0]) * 8);
        let raw = if chunk[1] == 0xFF {
            Err(rgb_portal::error::SensorError::EchoTimeout)
        } else {
            Ok(f32::from(chunk[1]) * 0.5)
        };
        let mode = PortalMode::ALL[usize::from(chunk[2]) % PortalMode::COUNT];
        let reading = sampler.classify(raw);
        let _ = detector.on_sample(now, reading, mode, &mut ByteRoll(chunk[2]));

        let t = detector.tracker();
        if t.in_passage {
            assert!(now.since(t.passage_started_at) <= now.since(start));
        }
    }
});
