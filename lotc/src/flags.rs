use std::path::PathBuf;

xflags::xflags! {
    /// Compiles course directories and inspects compiled courses.
    cmd lotc {
        /// Log at debug level unless LOTC_LOG or RUST_LOG say otherwise.
        optional -v, --verbose

        /// Compile the course in a directory to JSON.
        cmd compile {
            /// The course directory.
            required dir: PathBuf
            /// Where to write the JSON. Defaults to `<dir>/json/tutors.json`.
            optional -o, --output output: PathBuf
            /// Also render every markdown document to HTML.
            optional --html
        }

        /// Decorate a compiled course and print its tree, walls and flags.
        cmd inspect {
            /// The compiled course JSON.
            required json: PathBuf
            /// The id substituted into routes.
            required --course-id course_id: String
            /// The URL substituted into asset links.
            optional --course-url course_url: String
        }
    }
}
