fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed=proto/log.proto");
    tonic_build::configure().compile(&["proto/log.proto"], &["proto"])?;
    Ok(())
}
