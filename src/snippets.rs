/// Starter text placed in the editor when there is no history to resume.
const PLACEHOLDER: &str = "\n\n\n";

#[rustfmt::skip]
static SNIPPETS: &[(&str, &str)] = &[
    ("python", "\n"),
    ("javascript", "\n"),
    ("ruby", "\n"),
    ("bash", "#!/usr/bin/env bash\n\n"),
    ("lua", "\n"),
    ("perl", "use strict;\nuse warnings;\n\n"),
    ("go", "package main\n\nimport \"fmt\"\n\nfunc main() {\n\tfmt.Print()\n}\n"),
    ("java", "class Main {\n    public static void main(String[] args) {\n        \n    }\n}\n"),
    ("c", "#include <stdio.h>\n\nint main(void) {\n    \n    return 0;\n}\n"),
    ("cpp", "#include <iostream>\n\nint main() {\n    \n    return 0;\n}\n"),
    ("rust", "fn main() {\n    \n}\n"),
    ("zig", "const std = @import(\"std\");\n\npub fn main() !void {\n    \n}\n"),
    ("typescript", "\n"),
    ("csharp", "using System;\n\nclass Program {\n    static void Main(string[] args) {\n        \n    }\n}\n"),
    ("asm", "global _start\n\nsection .text\n_start:\n    mov rax, 60\n    xor rdi, rdi\n    syscall\n"),
    ("gas", ".global _start\n\n.text\n_start:\n    mov $60, %rax\n    xor %rdi, %rdi\n    syscall\n"),
    ("wat", "(module\n  (import \"env\" \"print\" (func $print (param i32)))\n  (func (export \"main\") (result i32)\n    i32.const 0))\n"),
];

/// Default snippet for a language key, or a few blank lines when the
/// language has none.
pub fn default_for(key: &str) -> &'static str {
    SNIPPETS
        .iter()
        .find(|(lang, _)| *lang == key)
        .map_or(PLACEHOLDER, |(_, snippet)| *snippet)
}
