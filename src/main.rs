fn main() {
    std::process::exit(cyberlens_lib::run());
}
