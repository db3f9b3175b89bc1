use clap::{Parser, Subcommand};
use dialoguer::{Input, Password};
use dotenvy::dotenv;
use schoolhouse_cli::seeder::{self, SeedConfig};
use schoolhouse_cli::teachers::{NewTeacher, create_teacher};
use schoolhouse_config::DatabaseConfig;
use schoolhouse_db::{PgPool, init_db_pool};
use schoolhouse_models::DepartmentId;

#[derive(Parser)]
#[command(name = "schoolhouse-cli")]
#[command(about = "Schoolhouse CLI - Administrative tools for Schoolhouse", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a teacher login account and profile
    CreateTeacher {
        #[arg(short = 'f', long)]
        first_name: Option<String>,

        #[arg(short = 'l', long)]
        last_name: Option<String>,

        #[arg(short = 'e', long)]
        email: Option<String>,

        /// School-issued teacher number
        #[arg(short = 't', long)]
        teacher_id: Option<String>,

        /// Department to file the teacher under
        #[arg(short = 'd', long)]
        department_id: Option<i64>,

        /// Password (will be prompted securely if not provided)
        #[arg(short = 'p', long)]
        password: Option<String>,
    },
    /// Seed the database with fake departments, courses, teachers and students
    Seed {
        #[arg(short = 'd', long, default_value = "5")]
        departments: usize,

        /// Courses per department
        #[arg(long, default_value = "6")]
        courses: usize,

        /// Teachers per department
        #[arg(long, default_value = "4")]
        teachers: usize,

        /// Students provisioned by each teacher
        #[arg(long, default_value = "20")]
        students: usize,
    },
    /// Remove all seeded data
    ClearSeed,
}

#[tokio::main]
async fn main() {
    dotenv().ok();

    if let Err(e) = run(Cli::parse()).await {
        eprintln!("\n❌ {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let pool = init_db_pool(&DatabaseConfig::from_env()?).await?;

    match cli.command {
        Commands::CreateTeacher {
            first_name,
            last_name,
            email,
            teacher_id,
            department_id,
            password,
        } => {
            let teacher = NewTeacher {
                first_name: prompt(first_name, "First name")?,
                last_name: prompt(last_name, "Last name")?,
                email: prompt(email, "Email address")?,
                teacher_id: prompt(teacher_id, "Teacher ID")?,
                password: match password {
                    Some(password) => password,
                    None => Password::new()
                        .with_prompt("Password")
                        .with_confirmation("Confirm password", "Passwords don't match")
                        .interact()?,
                },
                department_id: department_id.map(DepartmentId::from),
            };
            handle_create_teacher(&pool, teacher).await
        }
        Commands::Seed {
            departments,
            courses,
            teachers,
            students,
        } => {
            let config = SeedConfig {
                departments,
                courses_per_department: courses,
                teachers_per_department: teachers,
                students_per_teacher: students,
            };
            seeder::seed_all(&pool, config).await
        }
        Commands::ClearSeed => seeder::clear_all(&pool).await,
    }
}

fn prompt(value: Option<String>, label: &str) -> anyhow::Result<String> {
    match value {
        Some(value) => Ok(value),
        None => Ok(Input::<String>::new().with_prompt(label).interact_text()?),
    }
}

async fn handle_create_teacher(pool: &PgPool, teacher: NewTeacher) -> anyhow::Result<()> {
    create_teacher(pool, &teacher).await?;

    println!("\n✅ Teacher created successfully!");
    println!("   Email: {}", teacher.email);
    println!("   Name: {} {}", teacher.first_name, teacher.last_name);
    println!("   Teacher ID: {}", teacher.teacher_id);
    Ok(())
}
