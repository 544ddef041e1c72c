const MAX_COMPONENTS: usize = 5;
const MAX_DIGITS: usize = 8;
const MIN_COMPONENT: u32 = 1;
const MAX_COMPONENT: u32 = 99;

/// Check a dotted section number against the numbering grammar:
/// at most 5 components, each in 1..=99, at most 8 digits overall.
pub fn is_valid(number: &str) -> bool {
    if number.chars().filter(|c| *c != '.').count() > MAX_DIGITS {
        return false;
    }

    let parts: Vec<&str> = number.split('.').collect();
    if parts.len() > MAX_COMPONENTS {
        return false;
    }

    parts.iter().all(|p| {
        p.parse::<u32>()
            .map(|n| (MIN_COMPONENT..=MAX_COMPONENT).contains(&n))
            .unwrap_or(false)
    })
}

/// Parent number: drop the last component. Top-level numbers have no parent ("").
pub fn parent(number: &str) -> String {
    match number.rsplit_once('.') {
        Some((head, _)) => head.to_string(),
        None => String::new(),
    }
}

/// Component-wise integer key, so "2.10" sorts after "2.9".
pub fn sort_key(number: &str) -> Vec<u32> {
    number
        .split('.')
        .map(|p| p.parse::<u32>().unwrap_or(0))
        .collect()
}

pub fn depth(number: &str) -> usize {
    number.split('.').count()
}
