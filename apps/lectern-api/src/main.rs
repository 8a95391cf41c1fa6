use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = lectern_api::Args::parse();

	lectern_api::run(args).await
}
