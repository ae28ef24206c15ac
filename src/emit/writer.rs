//! Streams stub classes into a `_ide-helper.php` file.
//!
//! A `namespace ... {` block is opened whenever the namespace differs from
//! the previous class and closed before the next one opens, so the caller
//! decides grouping through the order it writes classes in.

use std::io::{self, Write};

use super::{StubClass, StubMethod};

pub struct StubWriter<W: Write> {
    out: W,
    /// Namespace of the open block, if any. `Some("")` is the global block.
    current: Option<String>,
}

impl<W: Write> StubWriter<W> {
    /// Start a helper file by writing the PHP open tag.
    pub fn new(mut out: W) -> io::Result<Self> {
        out.write_all(b"<?php\n\n")?;
        Ok(Self { out, current: None })
    }

    pub fn write_class(&mut self, class: &StubClass) -> io::Result<()> {
        if self.current.as_deref() != Some(class.namespace.as_str()) {
            self.close_block()?;
            if class.namespace.is_empty() {
                self.out.write_all(b"namespace {\n\n")?;
            } else {
                write!(self.out, "namespace {} {{\n\n", class.namespace)?;
            }
            self.current = Some(class.namespace.clone());
        }

        writeln!(self.out, "    class {}", class.short_name)?;
        writeln!(self.out, "    {{")?;
        for method in &class.methods {
            self.write_method(&class.service_class, method)?;
        }
        writeln!(self.out, "    }}")?;
        Ok(())
    }

    fn write_method(&mut self, service_class: &str, method: &StubMethod) -> io::Result<()> {
        writeln!(self.out, "        /**")?;
        for param in &method.doc_params {
            writeln!(self.out, "         * {}", param)?;
        }
        writeln!(self.out, "         * @return {}", method.return_type)?;
        writeln!(self.out, "         */")?;
        writeln!(
            self.out,
            "        public static function {}({}): {}",
            method.name, method.params, method.return_type
        )?;
        writeln!(self.out, "        {{")?;
        writeln!(self.out, "            /** @var \\{} $instance */", service_class)?;
        let keyword = if method.returns_value { "return " } else { "" };
        writeln!(
            self.out,
            "            {}$instance->{}({});",
            keyword, method.name, method.args
        )?;
        writeln!(self.out, "        }}")?;
        Ok(())
    }

    fn close_block(&mut self) -> io::Result<()> {
        if self.current.take().is_some() {
            self.out.write_all(b"}\n\n")?;
        }
        Ok(())
    }

    /// Close the last block, flush and hand back the sink.
    pub fn finish(mut self) -> io::Result<W> {
        self.close_block()?;
        self.out.flush()?;
        Ok(self.out)
    }
}
