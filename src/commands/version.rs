pub fn execute() {
    println!("esxprobe version {}", env!("CARGO_PKG_VERSION"));
}
