use std::{path::PathBuf, sync::LazyLock};

pub static DEFAULT_DATA_PATH: LazyLock<PathBuf> = LazyLock::new(|| {
    if let Some(custom) = std::env::var_os("MHWMM_HOME") {
        return PathBuf::from(custom);
    }

    let mut path = dirs::data_local_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_default();
    path.push("mhwmm");
    path
});

/// Computes a path inside the manager's data directory.
///
/// Returns a `&Path` referencing the data directory itself if no arguments are passed in, or a
/// `PathBuf` created by joining all of the arguments to the data directory if at least one
/// argument is passed in.
///
/// The data directory is `$MHWMM_HOME` when set, otherwise `<local data dir>/mhwmm`.
///
/// # Examples
///
/// ```
/// use mhwmm_rust::data_path;
///
/// let logs = data_path!("logs");
/// assert!(logs.ends_with("logs"));
/// assert_eq!(logs.parent(), Some(data_path!()));
/// ```
#[macro_export]
macro_rules! data_path {
    () => {
        $crate::paths::DEFAULT_DATA_PATH.as_path()
    };

    ( $( $path:expr ),+ $(,)? ) => {
        [
            $crate::paths::DEFAULT_DATA_PATH.as_path(),
            $( std::path::Path::new(&$path) ),+
        ].into_iter().collect::<std::path::PathBuf>()
    };
}
