fn main() -> anyhow::Result<()> {
    tagdeck::cli::run()
}
