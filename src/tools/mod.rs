//! Literature search tooling for research agents.
//!
//! The agents never talk to search providers directly; they depend on the
//! narrow [`LiteratureSearch`](search::LiteratureSearch) capability, which is
//! implemented by [`SearchTool`](search::SearchTool). The tool owns all the
//! economics of searching for one session:
//!
//! - **caching** - identical normalized queries within a session are answered
//!   from memory with no outbound call,
//! - **spacing** - non-cached queries are at least two seconds apart,
//! - **budget** - a hard per-session ceiling on outbound calls, after which
//!   searches short-circuit to an empty sentinel bundle.
//!
//! Providers sit behind their own traits so the tool is testable without the
//! network:
//!
//! - [`arxiv`] - primary academic search (free, no API key)
//! - [`serpapi`] - secondary web search, used only when arXiv under-delivers
//!   and a key was supplied

/// arXiv Atom API client (primary academic provider).
pub mod arxiv;
/// Session-scoped search tool with caching, spacing and budget enforcement.
pub mod search;
/// SerpAPI client (secondary web provider).
pub mod serpapi;

pub use arxiv::{AcademicSearchProvider, ArxivClient};
pub use search::{LiteratureSearch, SearchConfig, SearchTool};
pub use serpapi::{SerpApiClient, WebSearchProvider};
