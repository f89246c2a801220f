use headerforge::cli;

fn main() -> miette::Result<()> {
    cli::run()?;
    Ok(())
}
