//! Gradebook CLI Client
//!
//! Sends a single command to a Gradebook server and prints the response.

use std::time::Duration;

use clap::{Parser, Subcommand};
use gradebook::directory::{DirectoryClient, Lookup, SubjectDirectory};
use gradebook::protocol::Command;
use gradebook::Client;

/// Gradebook CLI
#[derive(Parser, Debug)]
#[command(name = "gradebook-cli")]
#[command(about = "CLI for the Gradebook server")]
struct Args {
    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:12345")]
    server: String,

    /// Subject directory address (for `subjects`)
    #[arg(short = 'D', long, default_value = "127.0.0.1:12346")]
    directory: String,

    /// Timeout in milliseconds
    #[arg(short, long, default_value = "5000")]
    timeout_ms: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Register a student
    AddStudent { id: String, name: String },

    /// Record a grade
    Add {
        id: String,
        subject: String,
        score: String,
    },

    /// List a student's grades
    Find { id: String },

    /// Update a grade (all of the student's grades when no subject is given)
    Update {
        id: String,
        score: String,

        /// Subject whose grade changes
        #[arg(long)]
        subject: Option<String>,
    },

    /// List every grade
    List,

    /// Delete all of a student's grades
    Delete { id: String },

    /// List the subjects the directory knows
    Subjects,

    /// Look up one subject code in the directory
    Subject { code: String },
}

fn main() {
    let args = Args::parse();
    let timeout = Duration::from_millis(args.timeout_ms);

    let command = match args.command {
        Commands::AddStudent { id, name } => Command::RegisterStudent { id, name },
        Commands::Add { id, subject, score } => Command::AddGrade {
            student_id: id,
            subject,
            score,
        },
        Commands::Find { id } => Command::FindGrades { student_id: id },
        Commands::Update { id, score, subject } => Command::UpdateGrade {
            student_id: id,
            subject,
            score,
        },
        Commands::List => Command::ListGrades,
        Commands::Delete { id } => Command::DeleteGrades { student_id: id },
        Commands::Subjects => {
            let directory = DirectoryClient::new(&args.directory, timeout);
            match directory.list_subjects() {
                Ok(subjects) => {
                    for subject in subjects {
                        println!("{}\t{}", subject.code, subject.name);
                    }
                }
                Err(e) => {
                    eprintln!("{}", e);
                    std::process::exit(1);
                }
            }
            return;
        }
        Commands::Subject { code } => {
            let directory = DirectoryClient::new(&args.directory, timeout);
            match directory.lookup(&code) {
                Ok(Lookup::Found(subject)) => println!("{}\t{}", subject.code, subject.name),
                Ok(Lookup::Unknown(reason)) => {
                    eprintln!("unknown subject {}: {}", code, reason);
                    std::process::exit(1);
                }
                Err(e) => {
                    eprintln!("{}", e);
                    std::process::exit(1);
                }
            }
            return;
        }
    };

    let response = Client::new(&args.server, timeout).send(&command);
    match serde_json::to_string_pretty(&response) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("cannot print response: {}", e),
    }
}
