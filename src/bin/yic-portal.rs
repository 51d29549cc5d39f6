use std::future::Future;
use std::path::PathBuf;

use anyhow::{anyhow, bail, Context};
use clap::{Parser, Subcommand};
use yic_portal::config::PortalConfig;
use yic_portal::nav::{self, NavControls};
use yic_portal::prelude::*;

const DEFAULT_SESSION_FILE: &str = ".yic-session.json";

#[derive(Parser, Debug)]
#[clap(name = "yic-portal", version)]
#[clap(about = "Young Innovators Club portal from the command line", long_about = None)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,

    /// Backend origin; overrides API_URL
    #[clap(long)]
    api_url: Option<String>,

    /// Where the session is kept; overrides YIC_SESSION_FILE
    #[clap(long)]
    session_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Log in with email and password
    Login {
        #[clap(long)]
        email: String,
        #[clap(long)]
        password: String,
    },
    /// Create a member account
    Register {
        #[clap(long)]
        full_name: String,
        #[clap(long)]
        email: String,
        #[clap(long)]
        password: String,
        /// student, mentor or staff
        #[clap(long, default_value = "student")]
        role: Role,
        #[clap(long)]
        student_id: Option<String>,
        #[clap(long)]
        department: Option<String>,
        #[clap(long)]
        year_of_study: Option<String>,
        #[clap(long)]
        bio: Option<String>,
        #[clap(long)]
        expertise: Option<String>,
        #[clap(long)]
        availability: Option<String>,
    },
    /// Print the Google sign-in URL to open in a browser
    Google,
    /// Finish Google sign-in with the URL the browser was sent back to
    Callback {
        /// The full return URL, including the `#access_token=...` fragment
        #[clap(long)]
        url: String,
    },
    /// Show the signed-in member's profile
    Profile,
    /// Show what the navigation bar would show
    Whoami,
    /// Browse mentors
    Mentors {
        #[clap(long)]
        search: Option<String>,
        #[clap(long)]
        department: Option<String>,
    },
    /// Sign out everywhere
    Logout,
}

/// Run `operation` unless Ctrl-C arrives first; the operation is dropped on interrupt
async fn interruptible<F: Future>(operation: F) -> anyhow::Result<F::Output> {
    tokio::select! {
        output = operation => Ok(output),
        _ = tokio::signal::ctrl_c() => Err(anyhow!("Interrupted")),
    }
}

fn report(page_error: Option<&str>, navigation: Option<Navigation>) -> anyhow::Result<()> {
    if let Some(error) = page_error {
        bail!("{}", error);
    }
    if let Some(navigation) = navigation {
        println!("Next: {}", navigation.route);
    }
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = PortalConfig::from_env().context("Invalid portal configuration")?;
    if let Some(api_url) = &cli.api_url {
        config = config.with_api_url(api_url);
    }
    let session_file = cli
        .session_file
        .or_else(|| config.session_file.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SESSION_FILE));
    config = config.with_session_file(Some(session_file));

    let portal = Portal::new(config).context("Could not open the portal session")?;

    let mut shell = portal.shell();
    interruptible(shell.mount()).await?;

    match cli.command {
        Commands::Login { email, password } => {
            let mut page = portal.login_page();
            page.email = email;
            page.password = password;
            let navigation = interruptible(page.submit()).await?;
            report(page.error(), navigation)?;
        }
        Commands::Register {
            full_name,
            email,
            password,
            role,
            student_id,
            department,
            year_of_study,
            bio,
            expertise,
            availability,
        } => {
            let mut page = portal.register_page(&Route::register());
            page.form.full_name = full_name;
            page.form.email = email;
            page.form.password = password;
            page.form.role = role;
            page.form.student_id = student_id.unwrap_or_default();
            if let Some(department) = department {
                page.form.department = department;
            }
            if let Some(year_of_study) = year_of_study {
                page.form.year_of_study = year_of_study;
            }
            page.form.bio = bio.unwrap_or_default();
            page.form.expertise = expertise.unwrap_or_default();
            page.form.availability = availability.unwrap_or_default();

            let checks = page.checks();
            println!("Password strength: {}/5", checks.password.strength());
            if let Some(email_error) = checks.email_error {
                println!("Email: {}", email_error);
            }

            let navigation = interruptible(page.submit()).await?;
            report(page.error(), navigation)?;
        }
        Commands::Google => {
            let mut page = portal.login_page();
            match page.sign_in_with_google() {
                Some(redirect) => println!("{}", redirect.url),
                None => report(page.error(), None)?,
            }
        }
        Commands::Callback { url } => {
            let session = interruptible(portal.identity.complete_redirect(&url)).await??;
            println!(
                "Signed in as {}",
                session.email().unwrap_or("an account without an email")
            );
            println!("Next: {}", Route::Profile);
        }
        Commands::Profile => {
            let mut page = portal.profile_page();
            let navigation = interruptible(page.load()).await?;
            if let Some(member) = page.member() {
                println!("{} <{}>", member.full_name, member.email);
                println!("Role: {}", member.role);
                if let Some(department) = &member.department {
                    println!("Department: {}", department);
                }
                if let Some(year) = &member.year_of_study {
                    println!("Year of study: {}", year);
                }
                if let Some(expertise) = &member.expertise {
                    println!("Expertise: {}", expertise);
                }
                println!("Points: {}", member.points);
                if let Some(joined) = member.joined_at() {
                    println!("Joined: {}", joined.format("%B %Y"));
                }
            }
            report(page.error(), navigation)?;
        }
        Commands::Whoami => {
            let bar = portal.nav(Route::Home);
            let links: Vec<&str> = nav::links().iter().map(|link| link.label).collect();
            println!("{}", links.join(" | "));
            match bar.controls() {
                NavControls::Member { email, profile } => {
                    println!("Signed in as {} ({})", email, profile)
                }
                NavControls::Guest { login, register } => {
                    println!("Not signed in: {} or {}", login, register)
                }
            }
        }
        Commands::Mentors { search, department } => {
            let mut directory = portal.mentor_directory();
            interruptible(directory.load()).await?;
            directory.search = search.unwrap_or_default();
            directory.department = department;

            println!("Departments: {}", directory.departments().join(", "));
            for mentor in directory.filtered() {
                println!(
                    "{} ({}) {}",
                    mentor.full_name,
                    mentor.role,
                    mentor.expertise.as_deref().unwrap_or("")
                );
            }
        }
        Commands::Logout => {
            let mut bar = portal.nav(Route::Home);
            let navigation = interruptible(bar.sign_out()).await?;
            println!("Signed out");
            report(None, Some(navigation))?;
        }
    }

    shell.unmount();
    Ok(())
}

#[tokio::main]
async fn main() {
    pretty_env_logger::init();

    if let Err(e) = run().await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
