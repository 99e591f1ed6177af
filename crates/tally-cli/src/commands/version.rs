//! Version command implementation.

const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn run() {
    println!("tally {VERSION}");
    println!();
    println!("A shared counter behind role-based access control.");
    println!();
    println!("Build info:");
    println!("  Target:       {}", std::env::consts::ARCH);
    println!("  OS:           {}", std::env::consts::OS);
}
