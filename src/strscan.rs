// strscan.rs - Exact substring search.
//
// Split on needle length: the first byte is located with memchr, then the
// rest of the needle is verified in place. A false start resumes the scan
// one byte past the candidate.

use memchr::memchr;

/// Offset of the first occurrence of `needle` in `haystack`.
///
/// An empty needle is never found.
///
/// ```
/// use rexmatch::strscan::find;
///
/// assert_eq!(find(b"aaab", b"ab"), Some(2));
/// assert_eq!(find(b"abc", b""), None);
/// ```
pub fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    match needle.len() {
        0 => None,
        1 => memchr(needle[0], haystack),
        2 => {
            let (k0, k1) = (needle[0], needle[1]);
            let mut from = 0;
            while haystack.len() - from >= 2 {
                // only positions with a byte after them can start a match
                let i = from + memchr(k0, &haystack[from..haystack.len() - 1])?;
                if haystack[i + 1] == k1 {
                    return Some(i);
                }
                from = i + 1;
            }
            None
        }
        n => {
            let (k0, rest) = (needle[0], &needle[1..]);
            let mut from = 0;
            while haystack.len() - from >= n {
                let last = haystack.len() - n;
                let i = from + memchr(k0, &haystack[from..=last])?;
                if &haystack[i + 1..i + n] == rest {
                    return Some(i);
                }
                from = i + 1;
            }
            None
        }
    }
}

/// Like [`find`], searching from `start` and returning an absolute offset.
/// A `start` past the end of `haystack` finds nothing.
#[inline]
pub fn find_from(haystack: &[u8], needle: &[u8], start: usize) -> Option<usize> {
    let tail = haystack.get(start..)?;
    find(tail, needle).map(|i| i + start)
}
