fn main() {
    mediq_lib::run()
}
