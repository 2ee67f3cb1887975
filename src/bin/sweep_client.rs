use servo_sweep::client::{
    choose_port, port_listing, DashboardKey, DashboardState, MenuChoice, KEY_HELP, MENU_HELP,
};
use servo_sweep::{available_ports, port_opens, Command, FramedSerialLink, LineProtocol, LineSink};
use std::io::Write;
use std::time::Duration;
use structopt::StructOpt;
use tokio::io::{stdin, AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::time::sleep;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

const ACK_WINDOW: Duration = Duration::from_millis(200);
// controller boards reset when the port opens
const CONNECT_SETTLE: Duration = Duration::from_secs(2);

type Input = Lines<BufReader<Stdin>>;

#[derive(StructOpt)]
#[structopt(about = "Line based dashboard for a servo sweep controller")]
pub struct Args {
    #[structopt(help = "Serial port of the controller, asks when omitted")]
    pub port: Option<String>,
    #[structopt(long, default_value = "9600", help = "Serial baud rate")]
    pub baud_rate: u32,
    #[structopt(long, help = "List serial ports and exit")]
    pub list_ports: bool,
}

enum Mode {
    Control,
    Menu,
}

async fn prompt(input: &mut Input, text: &str) -> anyhow::Result<String> {
    print!("{}", text);
    std::io::stdout().flush()?;
    Ok(input.next_line().await?.unwrap_or_default())
}

async fn connect(port: &str, baud_rate: u32) -> Option<FramedSerialLink> {
    match FramedSerialLink::open(port, baud_rate, LineProtocol::client()) {
        Ok(link) => {
            sleep(CONNECT_SETTLE).await;
            info!(%port, "connected to controller");
            Some(link)
        }
        Err(error) => {
            warn!(%port, %error, "could not connect, running in simulation mode");
            None
        }
    }
}

async fn select_port(input: &mut Input, baud_rate: u32) -> anyhow::Result<String> {
    let ports = available_ports().unwrap_or_else(|error| {
        warn!(%error, "port discovery failed");
        Vec::new()
    });
    let entry = if ports.is_empty() {
        println!("No serial devices found!");
        prompt(input, "Enter port manually: ").await?
    } else {
        println!(
            "Found serial devices:\n{}",
            port_listing(&ports, |port| port_opens(port, baud_rate))
        );
        let text = format!("Select port (1-{}) or Enter for auto: ", ports.len());
        prompt(input, &text).await?
    };
    let port = choose_port(&ports, &entry, |port| port_opens(port, baud_rate));
    println!("Using port: {}", port);
    Ok(port)
}

async fn change_port(
    input: &mut Input,
    link: &mut Option<FramedSerialLink>,
    dashboard: &mut DashboardState,
    port: Option<String>,
    baud_rate: u32,
) -> anyhow::Result<()> {
    let port = match port {
        Some(port) => port,
        None => prompt(input, "Enter new port (e.g., /dev/ttyUSB0): ").await?,
    };
    let port = port.trim();
    if port.is_empty() {
        return Ok(());
    }
    *link = None;
    *link = connect(port, baud_rate).await;
    dashboard.connected = link.is_some();
    Ok(())
}

async fn send(link: &mut Option<FramedSerialLink>, command: Command) {
    let link = match link.as_mut() {
        Some(link) => link,
        None => return,
    };
    if let Err(error) = link.write_line(&command.to_string()).await {
        println!("Error sending command: {}", error);
        return;
    }
    loop {
        match link.read_line_timeout(ACK_WINDOW).await {
            Ok(Some(status)) => println!("< {}", status),
            Ok(None) => break,
            Err(error) => {
                warn!(%error, "failed to read status line");
                break;
            }
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    FmtSubscriber::builder().with_env_filter(filter).init();

    let args = Args::from_args();
    let baud_rate = args.baud_rate;
    if args.list_ports {
        let ports = available_ports()?;
        println!("{}", port_listing(&ports, |port| port_opens(port, baud_rate)));
        return Ok(());
    }

    let mut input = BufReader::new(stdin()).lines();
    let port = match args.port {
        Some(port) => port,
        None => select_port(&mut input, baud_rate).await?,
    };
    let mut link = connect(&port, baud_rate).await;
    let mut dashboard = DashboardState::new(link.is_some());
    let mut mode = Mode::Control;
    println!("{}\n\n{}", dashboard.render(), KEY_HELP);

    while let Some(line) = input.next_line().await? {
        match mode {
            Mode::Menu => {
                match line.parse::<MenuChoice>() {
                    Ok(MenuChoice::Back) => mode = Mode::Control,
                    Ok(MenuChoice::ChangePort) => {
                        change_port(&mut input, &mut link, &mut dashboard, None, baud_rate).await?
                    }
                    Ok(choice) => {
                        if let Some(command) = dashboard.choose(choice) {
                            send(&mut link, command).await;
                        }
                    }
                    Err(error) => println!("{}", error),
                }
            }
            Mode::Control => {
                let key = match line.parse::<DashboardKey>() {
                    Ok(key) => key,
                    Err(error) => {
                        println!("{}\n{}", error, KEY_HELP);
                        continue;
                    }
                };
                if let Some(command) = dashboard.press(&key) {
                    send(&mut link, command).await;
                }
                match key {
                    DashboardKey::Quit => {
                        info!("shutting down");
                        break;
                    }
                    DashboardKey::Menu => mode = Mode::Menu,
                    DashboardKey::ChangePort(port) => {
                        change_port(&mut input, &mut link, &mut dashboard, port, baud_rate).await?
                    }
                    _ => {}
                }
            }
        }
        match mode {
            Mode::Menu => println!("MENU MODE\n{}", MENU_HELP),
            Mode::Control => println!("{}", dashboard.render()),
        }
    }
    Ok(())
}
