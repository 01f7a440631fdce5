use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = helpdesk_api::Args::parse();

	helpdesk_api::run(args).await
}
