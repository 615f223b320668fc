/// Bundles the reverb with nih_plug_xtask:
///
///   cargo xtask bundle loveless-reverb-v1 --release
///
/// The plugin is built as a cdylib and packaged under `target/bundled/`
/// as `Loveless Reverb.vst3` and `Loveless Reverb.clap`.
fn main() -> nih_plug_xtask::Result<()> {
    nih_plug_xtask::main()
}
