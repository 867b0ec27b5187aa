fn main() {
    // ESP-IDF link arguments are only needed when building the firmware
    // image; host builds (tests, fuzzing) skip the embuild toolchain.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
