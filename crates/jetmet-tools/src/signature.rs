//! Merging lookup signatures into one call contract.

/// Union of `signatures`, keeping first-seen order and dropping repeats.
pub fn aggregate_signature<'a, I, S>(signatures: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a S>,
    S: AsRef<[String]> + ?Sized + 'a,
{
    let mut out: Vec<String> = Vec::new();
    for sig in signatures {
        for input in sig.as_ref() {
            if !out.contains(input) {
                out.push(input.clone());
            }
        }
    }
    out
}
