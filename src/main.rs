fn main() {
    droplink_lib::run()
}
