#![no_main]

use libfuzzer_sys::fuzz_target;
use kismetscope::{pins::read_pins, PinVersion};

fuzz_target!(|data: &[u8]| {
    if let Some((&version, blob)) = data.split_first() {
        let _ = read_pins(blob, PinVersion::new(u32::from(version & 0x03)));
    }
});
