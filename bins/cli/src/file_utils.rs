use pio_asm::OutputFormat;
use pio_asm::utils::{write_output, write_words};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

fn is_stdio(path: &Path) -> bool {
    path.as_os_str() == "-"
}

/// Read the source from a file, or from stdin when the path is `-`
pub(crate) fn read_source(path: &Path) -> io::Result<String> {
    let mut contents = String::new();
    if is_stdio(path) {
        io::stdin().read_to_string(&mut contents)?;
    } else {
        File::open(path)?.read_to_string(&mut contents)?;
    }
    Ok(contents)
}

/// Write the words to a file, or to stdout when the path is `-`
pub(crate) fn write_program(code: &[u16], path: &Path, format: OutputFormat) -> io::Result<()> {
    if is_stdio(path) {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        write_words(code, &mut handle, format)
    } else {
        write_output(code, path, format)
    }
}
