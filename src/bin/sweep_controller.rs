use servo_sweep::{
    Controller, ControllerConfig, FramedSerialLink, LineProtocol, ServoId, TracingServo,
    DEFAULT_BAUD_RATE,
};
use std::time::Duration;
use structopt::StructOpt;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(StructOpt)]
#[structopt(about = "Sweep two servos, taking commands from a serial port")]
pub struct Args {
    #[structopt(help = "Serial port to read commands from")]
    pub port: String,
    #[structopt(long, default_value = "9600", help = "Serial baud rate")]
    pub baud_rate: u32,
    #[structopt(long, default_value = "15", help = "Initial step delay in milliseconds")]
    pub speed: i32,
    #[structopt(
        long,
        default_value = "100",
        help = "Pause per loop while stopped, in milliseconds"
    )]
    pub idle_ms: u64,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    FmtSubscriber::builder().with_env_filter(filter).init();

    let args = Args::from_args();
    if args.baud_rate != DEFAULT_BAUD_RATE {
        info!(baud_rate = args.baud_rate, "using non default baud rate");
    }
    let config = ControllerConfig::default()
        .with_baud_rate(args.baud_rate)
        .with_initial_speed(args.speed)
        .with_idle_interval(Duration::from_millis(args.idle_ms));

    let link = FramedSerialLink::open(&args.port, config.baud_rate, LineProtocol::controller())?;
    info!(port = %args.port, "listening for commands");

    let mut controller = Controller::new(
        link,
        Box::new(TracingServo::new(ServoId::One)),
        Box::new(TracingServo::new(ServoId::Two)),
        config,
    );
    controller.run().await?;
    Ok(())
}
