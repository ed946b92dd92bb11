//! Text spoken to the user.

pub const PLAYLISTS_BUFFER: &str = "Playlists";
pub const PLAY_QUEUE_BUFFER: &str = "Play Queue";

pub const TOP_OF_LIST: &str = "Top of list";
pub const BOTTOM_OF_LIST: &str = "Bottom of list";
pub const BUFFER_EMPTY: &str = "Buffer is empty";

pub const LOUDER: &str = "Louder";
pub const QUIETER: &str = "Quieter";
pub const PAUSED: &str = "Paused";
pub const PLAYING: &str = "Playing";
pub const NOTHING_PLAYING: &str = "No track currently being played";

pub const LOADING_PLAYLIST: &str = "Loading playlist";
pub const NO_SEARCH_RESULTS: &str = "No search results";

fn counted(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("1 {}", noun)
    } else {
        format!("{} {}s", count, noun)
    }
}

/// Spoken when the user lands on a buffer.
pub fn list_summary(name: &str, len: usize) -> String {
    if len == 0 {
        format!("{}, empty", name)
    } else {
        format!("{}, {}", name, counted(len, "item"))
    }
}

pub fn cannot_dismiss(name: &str) -> String {
    format!("Cannot dismiss buffer {}", name)
}

pub fn unable_to_play(reason: &str) -> String {
    format!("Unable to play track: {}", reason)
}

pub fn tracks_loaded(count: usize) -> String {
    format!("{} loaded", counted(count, "track"))
}

pub fn playlists_loaded(count: usize) -> String {
    format!("{} loaded", counted(count, "playlist"))
}

pub fn item_activated(text: &str) -> String {
    format!("{} item activated", text)
}

pub fn search_title(query: &str) -> String {
    format!("Search for: {}", query)
}

pub fn no_search_results(suggestion: Option<&str>) -> String {
    match suggestion {
        Some(suggestion) => format!("{}. Did you mean: {}", NO_SEARCH_RESULTS, suggestion),
        None => NO_SEARCH_RESULTS.to_string(),
    }
}

pub fn search_result_count(count: usize) -> String {
    counted(count, "search result")
}

pub fn skipped_unplayable(count: u32) -> String {
    format!("Skipped {}", counted(count as usize, "unplayable track"))
}
