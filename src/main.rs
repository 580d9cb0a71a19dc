fn main() {
    lost_slime::game::run();
}
