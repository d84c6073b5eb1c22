// Build script for hub-shuttle
// Generates Rust code from proto/hub_service.proto

fn main() -> Result<(), Box<dyn std::error::Error>> {
    std::env::set_var("PROTOC", protobuf_src::protoc());
    // Server codegen is only used by the test suite's mock hub.
    tonic_build::compile_protos("proto/hub_service.proto")?;
    Ok(())
}
