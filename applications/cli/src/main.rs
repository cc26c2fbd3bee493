/// Lyra - headless playback client
use clap::{Parser, Subcommand};
use lyra_cli::CliConfig;
use lyra_client::{ClientConfig, LyraClient};
use lyra_core::{
    PreferenceKind, PreferenceService, SessionStore, Track, TrackId, TrackQuery, TrackRepository,
};
use lyra_playback::{MediaEvent, PlaybackController, SilentBackend};
use lyra_sync::{NotificationBus, PreferenceSynchronizer};
use std::{path::PathBuf, sync::Arc, time::Duration};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "lyra")]
#[command(about = "Lyra headless playback client", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List tracks
    Tracks {
        /// Genre filter ("All" lists every genre)
        #[arg(short, long)]
        genre: Option<String>,
        /// Artist name filter
        #[arg(short, long)]
        artist: Option<String>,
        /// Search text
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Show one track
    Show {
        /// Track id
        id: TrackId,
    },
    /// Toggle favorite on a track
    Favorite {
        /// Track id
        id: TrackId,
    },
    /// Toggle dislike on a track
    Dislike {
        /// Track id
        id: TrackId,
    },
    /// List favorites and dislikes
    Prefs,
    /// List playlists (requires a session)
    Playlists,
    /// Run the playback controller against the silent backend
    Play {
        /// Track to start with (defaults to the last played one)
        #[arg(short, long)]
        track: Option<TrackId>,
        /// How long to run
        #[arg(short, long, default_value_t = 30)]
        seconds: u64,
        /// Shuffle the queue
        #[arg(long)]
        shuffle: bool,
        /// Repeat the current track
        #[arg(long)]
        repeat: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "lyra=info,lyra_playback=info,lyra_sync=info,lyra_client=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let config = CliConfig::load(cli.config.as_deref())?;
    config.validate()?;

    match cli.command {
        Commands::Tracks {
            genre,
            artist,
            search,
        } => {
            list_tracks(&config, genre, artist, search).await?;
        }
        Commands::Show { id } => {
            show_track(&config, id).await?;
        }
        Commands::Favorite { id } => {
            toggle(&config, id, PreferenceKind::Favorite).await?;
        }
        Commands::Dislike { id } => {
            toggle(&config, id, PreferenceKind::Dislike).await?;
        }
        Commands::Prefs => {
            list_preferences(&config).await?;
        }
        Commands::Playlists => {
            list_playlists(&config).await?;
        }
        Commands::Play {
            track,
            seconds,
            shuffle,
            repeat,
        } => {
            play(&config, track, seconds, shuffle, repeat).await?;
        }
    }

    Ok(())
}

fn connect(config: &CliConfig) -> anyhow::Result<LyraClient> {
    let client_config = match config.session() {
        Some(session) => ClientConfig::with_token(&config.server.url, session.token()),
        None => ClientConfig::new(&config.server.url),
    };
    Ok(LyraClient::new(client_config)?)
}

async fn open_store(config: &CliConfig) -> anyhow::Result<Arc<dyn SessionStore>> {
    let store = lyra_storage::open(&config.storage.database_url).await?;
    Ok(Arc::new(store))
}

async fn synchronizer(
    config: &CliConfig,
    client: &LyraClient,
) -> anyhow::Result<PreferenceSynchronizer> {
    let service: Arc<dyn PreferenceService> = Arc::new(client.clone());
    let sync = PreferenceSynchronizer::new(
        NotificationBus::new(),
        open_store(config).await?,
        Some(service),
        config.playback.allow_anonymous_preferences,
    )
    .with_repository(Arc::new(client.clone()));
    sync.switch_mode(config.session().is_some()).await?;
    Ok(sync)
}

fn print_track(track: &Track) {
    let marker = if track.is_favorite() {
        "+"
    } else if track.is_disliked() {
        "-"
    } else {
        " "
    };
    let genre = track.genre.as_deref().unwrap_or("-");
    println!(
        "{} {:>6}  {} - {} [{}]",
        marker, track.id, track.artist, track.title, genre
    );
}

async fn list_tracks(
    config: &CliConfig,
    genre: Option<String>,
    artist: Option<String>,
    search: Option<String>,
) -> anyhow::Result<()> {
    let client = connect(config)?;
    let query = TrackQuery::new()
        .with_genre(genre)
        .with_artist(artist)
        .with_search(search);

    let page = client.tracks().await.client().list_page(&query).await?;
    let count = page.items.len();
    let tracks = page
        .items
        .into_iter()
        .map(Track::try_from)
        .collect::<Result<Vec<_>, _>>()?;

    println!("Tracks:");
    for track in &tracks {
        print_track(track);
    }
    match page.total {
        Some(total) => println!("{} of {} tracks", count, total),
        None => println!("{} tracks", count),
    }

    Ok(())
}

async fn show_track(config: &CliConfig, id: TrackId) -> anyhow::Result<()> {
    let client = connect(config)?;
    let track = client.fetch_detail(id).await?;

    println!("{}", track.title);
    println!("  id:       {}", track.id);
    println!("  artist:   {}", track.artist);
    println!("  genre:    {}", track.genre.as_deref().unwrap_or("-"));
    println!("  audio:    {}", track.audio_path);
    if let Some(cover) = &track.cover_path {
        println!("  cover:    {}", cover);
    }
    if let Some(duration) = track.duration_secs {
        println!("  duration: {:.0}s", duration);
    }
    println!("  state:    {:?}", track.preference);
    if let Some(stats) = track.stats {
        println!(
            "  counts:   {} favorites, {} dislikes, {} reviews",
            stats.favorites_count, stats.dislikes_count, stats.reviews_count
        );
    }

    Ok(())
}

async fn toggle(config: &CliConfig, id: TrackId, kind: PreferenceKind) -> anyhow::Result<()> {
    let client = connect(config)?;
    let sync = synchronizer(config, &client).await?;

    let state = sync.toggle(id, kind).await?;
    tracing::info!("Preference mode: {:?}", sync.mode());
    println!("{}: {:?}", id, state);

    Ok(())
}

async fn list_preferences(config: &CliConfig) -> anyhow::Result<()> {
    let client = connect(config)?;
    let sync = synchronizer(config, &client).await?;

    let listed = client.fetch_list(&TrackQuery::new()).await?;
    // Listings carry no preference flags; remote mode reads each detail record
    let ids: Vec<TrackId> = listed.iter().map(|t| t.id).collect();
    sync.resolve(&ids).await;

    let title = |id: TrackId| {
        listed
            .iter()
            .find(|t| t.id == id)
            .map_or_else(|| "(not listed)".to_string(), |t| t.title.clone())
    };

    for (label, kind) in [
        ("Favorites", PreferenceKind::Favorite),
        ("Dislikes", PreferenceKind::Dislike),
    ] {
        println!("{}:", label);
        for id in sync.marked(kind) {
            println!("  {:>6}  {}", id, title(id));
        }
    }

    Ok(())
}

async fn list_playlists(config: &CliConfig) -> anyhow::Result<()> {
    let client = connect(config)?;
    let playlists = client.playlists().await?.client().list().await?;

    println!("Playlists:");
    for playlist in playlists {
        println!(
            "  {:>6}  {} ({} tracks)",
            playlist.id,
            playlist.name,
            playlist.tracks.len()
        );
    }

    Ok(())
}

async fn play(
    config: &CliConfig,
    track: Option<TrackId>,
    seconds: u64,
    shuffle: bool,
    repeat: bool,
) -> anyhow::Result<()> {
    let client = connect(config)?;
    let store = open_store(config).await?;

    let mut playback_config = config.playback_config();
    playback_config.shuffle |= shuffle;
    playback_config.repeat |= repeat;

    let controller = PlaybackController::new(
        playback_config,
        Arc::new(client.clone()),
        Some(Arc::new(client)),
        store,
        Box::new(SilentBackend::default()),
    )
    .with_session(config.session());

    controller.initialize().await;
    if let Some(id) = track {
        controller.select_track(id).await?;
    }
    controller.play().await?;

    if let Some(current) = controller.current_track().await {
        tracing::info!("Playing {} - {}", current.artist, current.title);
    }

    let deadline = tokio::time::sleep(Duration::from_secs(seconds));
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            () = &mut deadline => break,
            event = controller.wait_event() => match event {
                Some(MediaEvent::Ended) => {
                    if let Some(current) = controller.current_track().await {
                        tracing::info!("Now playing {} - {}", current.artist, current.title);
                    }
                }
                Some(MediaEvent::Failed { message }) => {
                    tracing::warn!("Playback failed: {}", message);
                }
                Some(_) => {}
                None => break,
            },
        }
    }

    controller.pause().await;
    let snapshot = controller.snapshot().await;
    println!(
        "Stopped at {:.1}s ({:?})",
        snapshot.position_secs, snapshot.state
    );
    if let Some(error) = snapshot.last_error {
        println!("Last error: {:?}: {}", error.kind, error.message);
    }

    Ok(())
}
