//! Interactive lock selection.

use anyhow::{Result, bail};
use lockvault_core::LockRecord;
use std::io::{BufRead, Write};

/// Ask the user to pick one of `locks` by its 1-based number.
///
/// Re-prompts until a listed number is entered. Fails if there are no locks
/// to choose from or the input ends first.
pub fn select_lock<'a, R: BufRead, W: Write>(
    locks: &'a [LockRecord],
    mut input: R,
    mut output: W,
) -> Result<&'a LockRecord> {
    if locks.is_empty() {
        bail!("no locks registered to this account");
    }

    let mut menu = String::from("Please select lock to generate codes for:\n");
    for (i, lock) in locks.iter().enumerate() {
        menu.push_str(&format!("{})\t{}\n", i + 1, lock.label()));
    }
    menu.push_str("> ");

    let mut line = String::new();
    loop {
        output.write_all(menu.as_bytes())?;
        output.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            bail!("no lock selected");
        }

        if let Ok(number) = line.trim().parse::<usize>()
            && let Some(lock) = number.checked_sub(1).and_then(|i| locks.get(i))
        {
            return Ok(lock);
        }
    }
}
