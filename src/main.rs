//! CLI driver for the pawfetch library
//!
//! Stands in for a frontend: logs in, applies search filters, prints
//! result pages, and can favorite dogs and request a match.
//!
//! Usage:
//!   pawfetch breeds
//!   pawfetch search [--breed <B>]... [--zip <Z>]... [--age-min N]
//!                   [--age-max N] [--sort <key:dir>] [--pages N]
//!   pawfetch match <dog-id>...
//!
//! Credentials come from PAWFETCH_NAME / PAWFETCH_EMAIL; the service
//! base URL can be overridden with PAWFETCH_BASE_URL.

use anyhow::{anyhow, bail, Context, Result};

use pawfetch::{
    ApiConfig, App, SearchSnapshot, SearchStatus, SortDirection, SortKey,
};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = args.first().map(String::as_str).unwrap_or("search");
    let rest: &[String] = args.get(1..).unwrap_or(&[]);

    let mut config = ApiConfig::default();
    if let Ok(base_url) = std::env::var("PAWFETCH_BASE_URL") {
        config.base_url = base_url;
    }

    let app = App::new(config);
    login(&app).await?;

    match command {
        "breeds" => {
            let breeds = app.api.list_breeds().await?;
            for breed in breeds {
                println!("{}", breed);
            }
        }
        "search" => run_search(&app, rest).await?,
        "match" => run_match(&app, rest).await?,
        other => bail!("unknown command: {}", other),
    }

    app.session.logout().await?;
    Ok(())
}

async fn login(app: &App) -> Result<()> {
    let name = std::env::var("PAWFETCH_NAME").context("PAWFETCH_NAME is not set")?;
    let email = std::env::var("PAWFETCH_EMAIL").context("PAWFETCH_EMAIL is not set")?;

    app.session
        .login(&name, &email)
        .await
        .context("login failed")?;

    if !app.session.verify().await? {
        bail!("session probe failed right after login");
    }
    Ok(())
}

async fn run_search(app: &App, args: &[String]) -> Result<()> {
    let mut breeds = Vec::new();
    let mut zip_codes = Vec::new();
    let mut age_min = 0;
    let mut age_max = 25;
    let mut pages = 1u32;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        let mut value = |name: &str| {
            iter.next()
                .cloned()
                .ok_or_else(|| anyhow!("{} needs a value", name))
        };
        match arg.as_str() {
            "--breed" => breeds.push(value("--breed")?),
            "--zip" => zip_codes.push(value("--zip")?),
            "--age-min" => age_min = value("--age-min")?.parse()?,
            "--age-max" => age_max = value("--age-max")?.parse()?,
            "--sort" => {
                let (key, direction) = parse_sort(&value("--sort")?)?;
                app.filters.set_sort_key(key);
                app.filters.set_sort_direction(direction);
            }
            "--pages" => pages = value("--pages")?.parse()?,
            other => bail!("unknown flag: {}", other),
        }
    }

    app.filters.set_breeds(breeds);
    app.filters.set_age_range(age_min, age_max);
    if !zip_codes.is_empty() {
        app.filters.set_zip_codes(zip_codes);
        app.filters.set_location_filter(true);
    }

    app.search.refresh().await?;
    print_page(&app.search.current().await)?;

    for _ in 1..pages {
        match app.search.next_page().await {
            Some(run) => {
                run.await?;
                print_page(&app.search.current().await)?;
            }
            None => break,
        }
    }

    Ok(())
}

async fn run_match(app: &App, ids: &[String]) -> Result<()> {
    if ids.is_empty() {
        bail!("match needs at least one dog id");
    }

    let dogs = app.api.fetch_dogs(ids).await?;
    if dogs.len() != ids.len() {
        log::warn!("only {} of {} ids resolved to dogs", dogs.len(), ids.len());
    }
    for dog in &dogs {
        app.favorites.toggle(dog);
    }

    match app.matchmaker.generate().await? {
        Some(dog) => println!(
            "Matched with {} - a {} year old {} near {}",
            dog.name, dog.age, dog.breed, dog.zip_code
        ),
        None => println!("The matched dog is no longer in your favorites"),
    }
    Ok(())
}

fn parse_sort(value: &str) -> Result<(SortKey, SortDirection)> {
    let (key, direction) = value
        .split_once(':')
        .ok_or_else(|| anyhow!("--sort expects <key:dir>, e.g. breed:asc"))?;

    let key = match key {
        "breed" => SortKey::Breed,
        "name" => SortKey::Name,
        "age" => SortKey::Age,
        other => bail!("unknown sort key: {}", other),
    };
    let direction = match direction {
        "asc" => SortDirection::Asc,
        "desc" => SortDirection::Desc,
        other => bail!("unknown sort direction: {}", other),
    };
    Ok((key, direction))
}

fn print_page(snapshot: &SearchSnapshot) -> Result<()> {
    match &snapshot.status {
        SearchStatus::Success => {}
        SearchStatus::Failed { error } => bail!("search failed: {}", error),
        SearchStatus::Pending => bail!("search still pending after refresh"),
    }

    println!(
        "-- page {}/{} ({} total) --",
        snapshot.page, snapshot.max_page, snapshot.total
    );
    for dog in &snapshot.dogs {
        println!(
            "{:<12} {:<24} {:<28} age {:>2}  zip {}",
            dog.id, dog.name, dog.breed, dog.age, dog.zip_code
        );
    }
    Ok(())
}
