use std::env;

use anyhow::{anyhow, bail, Context, Result};
use mentorbase::bases::{
    config_file_path, ensure_workspace_structure, load_or_default, save, AppConfig,
    MailTransportKind,
};

fn main() -> Result<()> {
    let paths = ensure_workspace_structure()?;
    let args = CliArgs::parse()?;
    let config_path = config_file_path()?;
    let mut config = load_or_default()?;
    let mut changed = !config_path.exists();

    changed |= args.apply(&mut config)?;

    if changed {
        save(&config)?;
        println!("Mentoring settings recorded at {}", config_path.display());
    } else {
        println!("Mentoring settings already configured.");
    }
    println!("Workspace: {}", paths.root.display());
    println!(
        "Session records: {}",
        paths.storage_container(&config).display()
    );

    Ok(())
}

#[derive(Default)]
struct CliArgs {
    model: Option<String>,
    question_count: Option<usize>,
    domain: Option<String>,
    sender: Option<String>,
    scheduling_link: Option<String>,
    transport: Option<MailTransportKind>,
    relay_url: Option<String>,
    smtp_host: Option<String>,
    smtp_port: Option<u16>,
    smtp_username: Option<String>,
    notifications: Option<bool>,
}

impl CliArgs {
    fn parse() -> Result<Self> {
        let mut args = env::args().skip(1);
        let mut parsed = Self::default();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--model" => {
                    parsed.model = Some(args.next().context("Expected a model name after --model")?);
                }
                "--question-count" => {
                    let value = args
                        .next()
                        .context("Expected a number after --question-count")?;
                    let count: usize = value
                        .parse()
                        .with_context(|| format!("Invalid question count '{value}'"))?;
                    if count == 0 {
                        bail!("--question-count must be at least 1");
                    }
                    parsed.question_count = Some(count);
                }
                "--domain" => {
                    parsed.domain = Some(args.next().context("Expected a domain after --domain")?);
                }
                "--sender" => {
                    parsed.sender =
                        Some(args.next().context("Expected an address after --sender")?);
                }
                "--scheduling-link" => {
                    parsed.scheduling_link = Some(
                        args.next()
                            .context("Expected a URL after --scheduling-link")?,
                    );
                }
                "--transport" => {
                    let value = args
                        .next()
                        .context("Expected outbox, http_relay or smtp after --transport")?;
                    parsed.transport = Some(match value.as_str() {
                        "outbox" => MailTransportKind::Outbox,
                        "http_relay" | "http-relay" => MailTransportKind::HttpRelay,
                        "smtp" => MailTransportKind::Smtp,
                        other => bail!("Unknown transport '{other}'"),
                    });
                }
                "--relay-url" => {
                    parsed.relay_url =
                        Some(args.next().context("Expected a URL after --relay-url")?);
                }
                "--smtp-host" => {
                    parsed.smtp_host =
                        Some(args.next().context("Expected a host after --smtp-host")?);
                }
                "--smtp-port" => {
                    let value = args.next().context("Expected a port after --smtp-port")?;
                    parsed.smtp_port = Some(
                        value
                            .parse()
                            .with_context(|| format!("Invalid SMTP port '{value}'"))?,
                    );
                }
                "--smtp-username" => {
                    parsed.smtp_username =
                        Some(args.next().context("Expected a user after --smtp-username")?);
                }
                "--disable-notifications" => parsed.notifications = Some(false),
                "--enable-notifications" => parsed.notifications = Some(true),
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                other => {
                    return Err(anyhow!(
                        "Unknown argument '{other}'. Run with --help for usage instructions."
                    ));
                }
            }
        }
        Ok(parsed)
    }

    /// Writes overrides into `config`, returning whether anything changed.
    fn apply(self, config: &mut AppConfig) -> Result<bool> {
        let mut changed = false;
        changed |= set_if_changed(&mut config.completion.model, self.model);
        changed |= set_if_changed(&mut config.quiz.question_count, self.question_count);
        changed |= set_if_changed(&mut config.quiz.domain, self.domain);
        changed |= set_if_changed(&mut config.notifications.sender, self.sender);
        changed |= set_if_changed(
            &mut config.notifications.scheduling_link,
            self.scheduling_link,
        );
        changed |= set_if_changed(&mut config.notifications.transport, self.transport);
        changed |= set_if_changed(&mut config.notifications.relay_url, self.relay_url.map(Some));
        changed |= set_if_changed(&mut config.notifications.smtp_host, self.smtp_host.map(Some));
        changed |= set_if_changed(&mut config.notifications.smtp_port, self.smtp_port);
        changed |= set_if_changed(
            &mut config.notifications.smtp_username,
            self.smtp_username.map(Some),
        );
        changed |= set_if_changed(&mut config.notifications.enabled, self.notifications);

        if config.notifications.transport == MailTransportKind::HttpRelay
            && config.notifications.relay_url.is_none()
        {
            bail!("--relay-url is required when the http_relay transport is selected");
        }
        if config.notifications.transport == MailTransportKind::Smtp
            && config.notifications.smtp_host.is_none()
        {
            bail!("--smtp-host is required when the smtp transport is selected");
        }
        Ok(changed)
    }
}

fn set_if_changed<T: PartialEq>(slot: &mut T, value: Option<T>) -> bool {
    match value {
        Some(value) if *slot != value => {
            *slot = value;
            true
        }
        _ => false,
    }
}

fn print_usage() {
    println!("MentorBase setup");
    println!("Records completion, quiz and notification settings in config.toml.");
    println!("Usage: cargo run --bin mentor-setup -- [options]");
    println!("Options:");
    println!("  --model <name>              Completion model (default: gpt-4)");
    println!("  --question-count <n>        Questions per quiz (default: 10)");
    println!("  --domain <text>             Assessed domain (default: data engineering)");
    println!("  --sender <address>          From address for follow-up emails");
    println!("  --scheduling-link <url>     Booking link included in follow-ups");
    println!("  --transport <kind>          outbox | http_relay | smtp");
    println!("  --relay-url <url>           HTTP mail relay endpoint");
    println!("  --smtp-host <host>          SMTP server (STARTTLS required)");
    println!("  --smtp-port <port>          SMTP port (default: 587)");
    println!("  --smtp-username <user>      SMTP login (default: sender address)");
    println!("  --enable-notifications      Send follow-up emails");
    println!("  --disable-notifications     Skip follow-up emails");
    println!("Environment:");
    println!("  MENTORBASE_SMTP_PASSWORD    SMTP password (see [notifications].smtp_password_env)");
}
