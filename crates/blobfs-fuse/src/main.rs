//! blobfs binary: mount a SQLite database as a read-only filesystem.
//!
//! Usage:
//!   blobfs <DATABASE> <MOUNTPOINT>
//!
//! The tree is `/<table>/<key>/<column>`: each table is a directory, each
//! row a subdirectory named by its encoded primary key, each column a
//! regular file holding the value's bytes. Everything is answered from
//! live queries; unmount with `fusermount -u <MOUNTPOINT>`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use fuser::MountOption;
use tracing_subscriber::{EnvFilter, fmt};

use blobfs_core::{BlobFs, Db};

mod fuse;
mod inode;

/// Mount a SQLite database as a read-only directory tree.
#[derive(Parser, Debug)]
#[command(name = "blobfs")]
#[command(about = "Mount a SQLite database as a read-only filesystem")]
struct Args {
    /// SQLite database to expose
    database: PathBuf,

    /// Directory to mount on
    mountpoint: PathBuf,

    /// Allow other users to access the mount
    #[arg(long)]
    allow_other: bool,
}

fn main() -> Result<()> {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let db = Db::open(&args.database)
        .with_context(|| format!("cannot open database {}", args.database.display()))?;
    let fs = BlobFs::new(db);

    let mut options = vec![
        MountOption::RO,
        MountOption::FSName("blobfs".to_owned()),
        MountOption::DefaultPermissions,
    ];
    if args.allow_other {
        options.push(MountOption::AllowOther);
    }

    tracing::info!(
        database = %args.database.display(),
        mountpoint = %args.mountpoint.display(),
        "mounting"
    );

    // Single-threaded session: requests are served one at a time on this
    // thread, which is what keeps the lone connection safe to share.
    fuser::mount2(fuse::BlobFuse::new(fs), &args.mountpoint, &options)
        .with_context(|| format!("cannot mount on {}", args.mountpoint.display()))?;

    tracing::info!("unmounted");
    Ok(())
}
