//! Admin utilities for murmur: bootstrap accounts without going through
//! the signup/activation mail loop.

use std::error::Error;

use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use migration::MigratorTrait;
use sea_orm::{
    ActiveValue, ColumnTrait, Database, DatabaseConnection, EntityTrait, QueryFilter,
};
use uuid::Uuid;

mod users {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "users")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: String,
        pub name: String,
        pub email: String,
        pub password_hash: String,
        pub activated: bool,
        pub activation_token: Option<String>,
        pub reset_token: Option<String>,
        pub reset_sent_at: Option<DateTimeUtc>,
        pub admin: bool,
        pub created_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

#[derive(Parser, Debug)]
#[command(name = "murmur_admin")]
#[command(about = "Admin utilities for murmur (bootstrap users)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./murmur.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    User(User),
}

#[derive(Args, Debug)]
struct User {
    #[command(subcommand)]
    command: UserCommand,
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    /// Create an account, already activated.
    Create(UserCreateArgs),
    /// Grant the admin flag to an existing account.
    Promote(UserEmailArgs),
    /// Force-activate an account without its mail token.
    Activate(UserEmailArgs),
}

#[derive(Args, Debug)]
struct UserCreateArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    password: String,
    #[arg(long, default_value_t = false)]
    admin: bool,
}

#[derive(Args, Debug)]
struct UserEmailArgs {
    #[arg(long)]
    email: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let db = Database::connect(&cli.database_url).await?;
    migration::Migrator::up(&db, None).await?;

    match cli.command {
        Command::User(user) => match user.command {
            UserCommand::Create(args) => create_user(&db, args).await,
            UserCommand::Promote(args) => promote_user(&db, &args.email).await,
            UserCommand::Activate(args) => activate_user(&db, &args.email).await,
        },
    }
}

async fn find_by_email(
    db: &DatabaseConnection,
    email: &str,
) -> Result<Option<users::Model>, Box<dyn Error + Send + Sync>> {
    let model = users::Entity::find()
        .filter(users::Column::Email.eq(email.trim().to_lowercase()))
        .one(db)
        .await?;
    Ok(model)
}

async fn create_user(
    db: &DatabaseConnection,
    args: UserCreateArgs,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let email = args.email.trim().to_lowercase();
    if find_by_email(db, &email).await?.is_some() {
        return Err(format!("user with email {email} already exists").into());
    }

    let model = users::ActiveModel {
        id: ActiveValue::Set(Uuid::new_v4().to_string()),
        name: ActiveValue::Set(args.name.trim().to_string()),
        email: ActiveValue::Set(email.clone()),
        password_hash: ActiveValue::Set(engine::password::hash(&args.password)?),
        activated: ActiveValue::Set(true),
        activation_token: ActiveValue::Set(None),
        reset_token: ActiveValue::Set(None),
        reset_sent_at: ActiveValue::Set(None),
        admin: ActiveValue::Set(args.admin),
        created_at: ActiveValue::Set(Utc::now()),
    };
    users::Entity::insert(model).exec(db).await?;

    println!("created user {email}");
    Ok(())
}

async fn promote_user(
    db: &DatabaseConnection,
    email: &str,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let model = find_by_email(db, email)
        .await?
        .ok_or_else(|| format!("no user with email {email}"))?;

    let mut active: users::ActiveModel = model.into();
    active.admin = ActiveValue::Set(true);
    users::Entity::update(active).exec(db).await?;

    println!("promoted {email} to admin");
    Ok(())
}

async fn activate_user(
    db: &DatabaseConnection,
    email: &str,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let model = find_by_email(db, email)
        .await?
        .ok_or_else(|| format!("no user with email {email}"))?;

    let mut active: users::ActiveModel = model.into();
    active.activated = ActiveValue::Set(true);
    active.activation_token = ActiveValue::Set(None);
    users::Entity::update(active).exec(db).await?;

    println!("activated {email}");
    Ok(())
}
