use std::{error::Error, io, path::Path, process::exit};

use clap::Parser;
use rusqlite::Connection;

use fintrack_rs::{
    PasswordHash, ValidatedPassword, initialize_db,
    user::{NewUser, Role, count_users, create_user},
};

/// A utility for creating an admin account from the terminal.
///
/// Accounts registered through the API always start with the `user` role and
/// roles can only be raised by an existing admin or manager, so the first
/// privileged account has to be created out-of-band with this tool.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long)]
    db_path: String,

    /// The display name for the admin account.
    #[arg(long)]
    name: String,

    /// The email address for the admin account.
    #[arg(long)]
    email: String,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    validate_db_path(Path::new(&args.db_path));

    let connection = Connection::open(&args.db_path)?;
    initialize_db(&connection)?;

    let user_count = count_users(&connection)?;
    println!("The database currently holds {user_count} account(s).");

    let password_hash = match prompt_password_hash() {
        Some(password_hash) => password_hash,
        None => return Ok(()),
    };

    let admin = create_user(
        NewUser {
            name: args.name,
            email: args.email,
            password_hash,
            role: Role::Admin,
        },
        &connection,
    )?;

    println!("Created admin account {} ({})", admin.name, admin.email);

    Ok(())
}

fn validate_db_path(db_path: &Path) {
    match db_path.extension() {
        None => {
            print_error("Database path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            print_error("Database path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }
}

fn prompt_password_hash() -> Option<PasswordHash> {
    loop {
        println!();

        let first_password =
            match rpassword::prompt_password("Enter a password for the admin account: ") {
                Ok(string) => string,
                Err(error) if error.kind() == io::ErrorKind::UnexpectedEof => {
                    return None;
                }
                Err(error) => {
                    print_error(format!("Could not read password from stdin: {error}"));
                    exit(1);
                }
            };

        let validated_password = match ValidatedPassword::new(&first_password) {
            Ok(password) => password,
            Err(error) => {
                print_error(format!("{error}"));
                continue;
            }
        };

        let confirm_password = match rpassword::prompt_password("Confirm the password: ") {
            Ok(string) => string,
            Err(_) => return None,
        };

        if first_password != confirm_password {
            print_error("Passwords do not match, try again.");
            continue;
        }

        match PasswordHash::new(validated_password, PasswordHash::DEFAULT_COST) {
            Ok(password_hash) => return Some(password_hash),
            Err(error) => {
                print_error(format!("Could not hash password: {error}"));
                exit(1);
            }
        }
    }
}

fn print_error(message: impl AsRef<str>) {
    eprintln!("ERROR: {}", message.as_ref());
}
