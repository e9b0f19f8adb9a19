#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationNavigationKind {
    /// Full navigation: a `location.href` assignment or a followed link.
    HrefSet,
    /// Default action of a fragment-only anchor.
    Fragment,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationNavigation {
    pub kind: LocationNavigationKind,
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LocationParts {
    pub(crate) scheme: String,
    pub(crate) has_authority: bool,
    pub(crate) host: String,
    pub(crate) pathname: String,
    pub(crate) opaque_path: String,
    pub(crate) search: String,
    pub(crate) hash: String,
}

impl LocationParts {
    pub(crate) fn href(&self) -> String {
        if self.has_authority {
            let path = if self.pathname.is_empty() {
                "/"
            } else {
                self.pathname.as_str()
            };
            format!(
                "{}://{}{}{}{}",
                self.scheme, self.host, path, self.search, self.hash
            )
        } else {
            format!(
                "{}:{}{}{}",
                self.scheme, self.opaque_path, self.search, self.hash
            )
        }
    }

    pub(crate) fn parse(input: &str) -> Option<Self> {
        let trimmed = input.trim();
        let scheme_end = trimmed.find(':')?;
        let scheme = trimmed[..scheme_end].to_ascii_lowercase();
        if !is_valid_url_scheme(&scheme) {
            return None;
        }
        let rest = &trimmed[scheme_end + 1..];
        if let Some(without_slashes) = rest.strip_prefix("//") {
            let authority_end = without_slashes
                .find(['/', '?', '#'])
                .unwrap_or(without_slashes.len());
            let host = without_slashes[..authority_end].to_ascii_lowercase();
            let (pathname, search, hash) = split_path_search_hash(&without_slashes[authority_end..]);
            Some(Self {
                scheme,
                has_authority: true,
                host,
                pathname: normalize_pathname(&pathname),
                opaque_path: String::new(),
                search,
                hash,
            })
        } else {
            let (opaque_path, search, hash) = split_path_search_hash(rest);
            Some(Self {
                scheme,
                has_authority: false,
                host: String::new(),
                pathname: String::new(),
                opaque_path,
                search,
                hash,
            })
        }
    }

    /// Resolves `input` the way `location.href = input` would from `self`.
    pub(crate) fn resolve(&self, input: &str) -> String {
        let input = input.trim();
        if input.is_empty() {
            let mut same = self.clone();
            same.hash.clear();
            return same.href();
        }

        if let Some(parts) = Self::parse(input) {
            return parts.href();
        }

        if input.starts_with("//") {
            return Self::parse(&format!("{}:{}", self.scheme, input))
                .map(|parts| parts.href())
                .unwrap_or_else(|| input.to_string());
        }

        let mut next = self.clone();
        if let Some(hash) = input.strip_prefix('#') {
            next.hash = format!("#{hash}");
            return next.href();
        }

        let (path, search, hash) = split_path_search_hash(input);
        next.search = search;
        next.hash = hash;
        if path.is_empty() {
            return next.href();
        }

        if !next.has_authority {
            next.opaque_path = path;
        } else if path.starts_with('/') {
            next.pathname = normalize_pathname(&path);
        } else {
            let base_dir = match next.pathname.rsplit_once('/') {
                Some((prefix, _)) => format!("{prefix}/"),
                None => "/".to_string(),
            };
            next.pathname = normalize_pathname(&format!("{base_dir}{path}"));
        }
        next.href()
    }

    /// Same document apart from the fragment.
    pub(crate) fn is_fragment_only_change(&self, other: &Self) -> bool {
        self.scheme == other.scheme
            && self.has_authority == other.has_authority
            && self.host == other.host
            && self.pathname == other.pathname
            && self.opaque_path == other.opaque_path
            && self.search == other.search
    }
}

fn is_valid_url_scheme(scheme: &str) -> bool {
    let mut chars = scheme.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    first.is_ascii_alphabetic()
        && chars.all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '+' | '-' | '.'))
}

fn split_path_search_hash(tail: &str) -> (String, String, String) {
    let (before_hash, hash) = match tail.find('#') {
        Some(pos) => tail.split_at(pos),
        None => (tail, ""),
    };
    let (path, search) = match before_hash.find('?') {
        Some(pos) => before_hash.split_at(pos),
        None => (before_hash, ""),
    };
    (path.to_string(), search.to_string(), hash.to_string())
}

fn normalize_pathname(pathname: &str) -> String {
    let ends_with_slash = pathname.ends_with('/')
        || pathname.ends_with("/.")
        || pathname.ends_with("/..");
    let mut parts: Vec<&str> = Vec::new();
    for segment in pathname.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            _ => parts.push(segment),
        }
    }
    let mut out = format!("/{}", parts.join("/"));
    if ends_with_slash && !out.ends_with('/') {
        out.push('/');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> LocationParts {
        LocationParts::parse("https://Coffee.local/blog/7/?page=2#top").expect("valid base url")
    }

    #[test]
    fn parse_splits_components() {
        let parts = base();
        assert_eq!(parts.scheme, "https");
        assert_eq!(parts.host, "coffee.local");
        assert_eq!(parts.pathname, "/blog/7/");
        assert_eq!(parts.search, "?page=2");
        assert_eq!(parts.hash, "#top");
        assert_eq!(parts.href(), "https://coffee.local/blog/7/?page=2#top");
    }

    #[test]
    fn resolves_root_relative_paths_without_query_or_fragment() {
        assert_eq!(base().resolve("/login/"), "https://coffee.local/login/");
        assert_eq!(base().resolve("/a/./b/../c"), "https://coffee.local/a/c");
    }

    #[test]
    fn resolves_relative_paths_against_the_current_directory() {
        assert_eq!(base().resolve("reply"), "https://coffee.local/blog/7/reply");
        assert_eq!(base().resolve("../"), "https://coffee.local/blog/");
        assert_eq!(base().resolve("?page=3"), "https://coffee.local/blog/7/?page=3");
    }

    #[test]
    fn resolves_fragments_and_absolute_urls() {
        assert_eq!(
            base().resolve("#reply_42"),
            "https://coffee.local/blog/7/?page=2#reply_42"
        );
        assert_eq!(base().resolve("http://other.test"), "http://other.test/");
        assert_eq!(base().resolve("//cdn.test/x"), "https://cdn.test/x");
        assert_eq!(base().resolve(""), "https://coffee.local/blog/7/?page=2");
    }

    #[test]
    fn fragment_only_change_ignores_hash_but_nothing_else() {
        let from = base();
        let same_doc = LocationParts::parse(&from.resolve("#reply_1")).expect("valid");
        let other_doc = LocationParts::parse(&from.resolve("/blog/")).expect("valid");
        assert!(from.is_fragment_only_change(&same_doc));
        assert!(!from.is_fragment_only_change(&other_doc));
    }
}
