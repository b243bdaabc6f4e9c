use crate::demo::{run_assess, run_demo, run_late_fee, AssessArgs, DemoArgs, LateFeeArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use tenant_billing::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Tenant Billing Core",
    about = "Run the tenant billing service or evaluate bills from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Evaluate due dates and late fees without starting the server
    Billing {
        #[command(subcommand)]
        command: BillingCommand,
    },
    /// Walk through late fees, proration, and a lease lifecycle with sample data
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum BillingCommand {
    /// Assess the late fee for a single bill described by flags
    LateFee(LateFeeArgs),
    /// Assess every bill in a CSV export and print a fee report
    Assess(AssessArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Billing {
            command: BillingCommand::LateFee(args),
        } => run_late_fee(args),
        Command::Billing {
            command: BillingCommand::Assess(args),
        } => run_assess(args),
        Command::Demo(args) => run_demo(args),
    }
}
