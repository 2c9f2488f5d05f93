use anyhow::Result;

fn main() -> Result<()> {
    trustynp_cli::run()
}
