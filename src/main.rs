use geopulse::app::{self, AppContext};
use geopulse::settings::{apply_global, load_from_cli};
use geopulse::{logging, storage};
use std::io::{self, Write};

fn main() -> io::Result<()> {
    let settings = load_from_cli()
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, err.to_string()))?;
    logging::init(settings.log_level);

    let mut global = storage::load_config(settings.config_path.as_deref())
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err.to_string()))?;
    apply_global(&settings, &mut global);

    let context = AppContext::from_config(global);
    let stdout = io::stdout();
    let mut out = stdout.lock();
    app::run(&settings.request, &context, &mut out).map_err(|err| io::Error::other(err.to_string()))?;
    out.flush()
}
