fn main() {
    questpilot::run();
}
