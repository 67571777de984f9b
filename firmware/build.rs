use std::env;

fn main() {
    // Configure for ATmega128
    println!("cargo:rustc-link-arg=-mmcu=atmega128");

    // Ensure target is correct
    let target = env::var("TARGET").unwrap();
    if !target.contains("avr") {
        panic!("precision_vcc_firmware only supports AVR targets!");
    }
}
