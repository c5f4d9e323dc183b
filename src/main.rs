mod platform;

fn main() {
    platform::start();
}
