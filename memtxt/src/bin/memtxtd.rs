use std::env;
extern crate memtxt;

fn main() {
    memtxt::server::main::run(env::args().collect());
}
