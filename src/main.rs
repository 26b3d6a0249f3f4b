fn main() {
    std::process::exit(letter_avatar::run());
}
