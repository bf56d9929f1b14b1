fn main() -> Result<(), Box<dyn std::error::Error>> {
    tonic_build::configure().compile_protos(
        &["proto/ubo/v1/ubo.proto", "proto/store/v1/store.proto"],
        &["proto"],
    )?;

    // Ensure we rebuild when proto files change
    println!("cargo:rerun-if-changed=proto");

    Ok(())
}
