//! Option tables transcribed from the tools' help text

use crate::catalog::{OptionSpec, StageSchema};

const MAKEKING: &[OptionSpec] = &[
    OptionSpec::value_or("b", "specify Steve's rescaling parameter (< 1)", "0"),
    OptionSpec::flag("i", "number the particles sequentially"),
    OptionSpec::required("n", "specify number of particles"),
    OptionSpec::seed("s"),
    OptionSpec::flag("u", "leave final N-body system unscaled"),
    OptionSpec::required("w", "specify King dimensionless depth"),
];

const MAKEPLUMMER: &[OptionSpec] = &[
    OptionSpec::value("c", "add a comment to the output snapshot"),
    OptionSpec::flag("C", "output data in 'col' format"),
    OptionSpec::flag("i", "number the particles sequentially"),
    OptionSpec::value("m", "specify mass cutoff (for finite radius)"),
    OptionSpec::required("n", "specify number of particles"),
    OptionSpec::flag("o", "echo value of random seed"),
    OptionSpec::value("r", "specify radius cutoff"),
    OptionSpec::flag("R", "toggle reshuffle of particles"),
    OptionSpec::seed("s"),
    OptionSpec::flag("u", "leave unscaled"),
];

const MAKESPHERE: &[OptionSpec] = &[
    OptionSpec::value("c", "add a comment to the output snapshot"),
    OptionSpec::flag("C", "output data in 'col' format"),
    OptionSpec::flag("i", "number the particles sequentially"),
    OptionSpec::flag("l", "write sphere radius to dyn story"),
    OptionSpec::required("n", "specify number of particles"),
    OptionSpec::flag("o", "echo value of random seed"),
    OptionSpec::value("R", "specify sphere radius"),
    OptionSpec::seed("s"),
    OptionSpec::flag("u", "leave unscaled"),
    OptionSpec::flag("U", "leave unscaled and don't place in center of mass frame"),
];

const MAKECUBE: &[OptionSpec] = &[
    OptionSpec::value("c", "add a comment to the output snapshot"),
    OptionSpec::flag("C", "output data in 'col' format"),
    OptionSpec::flag("i", "number the particles sequentially"),
    OptionSpec::flag("l", "write cube size to dyn story"),
    OptionSpec::value("L", "specify cube size (+/-L)"),
    OptionSpec::required("n", "specify number of particles"),
    OptionSpec::flag("o", "echo value of random seed"),
    OptionSpec::seed("s"),
    OptionSpec::flag("u", "leave unscaled"),
];

const MAKEMASS: &[OptionSpec] = &[
    OptionSpec::flag("C", "output in 'col' format"),
    OptionSpec::value("e", "exponent"),
    OptionSpec::value("F", "mass function name"),
    OptionSpec::value("f", "mass function number"),
    OptionSpec::value("h", "fraction of stars in high-mass group (TwoComponent)"),
    OptionSpec::flag("i", "(re)number stellar index from highest to lowest mass"),
    OptionSpec::value("l", "lower mass limit"),
    OptionSpec::value("m", "scale to specified total mass"),
    OptionSpec::value("u", "upper mass limit"),
    OptionSpec::seed("s"),
];

const MAKESECONDARY: &[OptionSpec] = &[
    OptionSpec::flag("C", "force output in 'col' format"),
    OptionSpec::value("f", "specify binary fraction"),
    OptionSpec::flag("i", "use (a,b) as component indices"),
    OptionSpec::flag("I", "don't limit masses to primary mass range"),
    OptionSpec::value("l", "specify lower limit on mass ratio or secondary mass"),
    OptionSpec::value("M", "specify upper limit for primaries to be binaries"),
    OptionSpec::value("m", "specify lower limit for primaries to be binaries"),
    OptionSpec::flag("q", "select choice of minimum mass ratio"),
    OptionSpec::flag("S", "split primary star"),
    OptionSpec::seed("s"),
    OptionSpec::value("u", "specify upper limit on mass ratio or secondary mass"),
];

const MAKEBINARY: &[OptionSpec] = &[
    OptionSpec::value("f", "function select option"),
    OptionSpec::value("e", "maximum eccentricity"),
    OptionSpec::value("l", "lower limit on selected binary parameter"),
    OptionSpec::value("o", "specify interpretation of limits"),
    OptionSpec::seed("s"),
    OptionSpec::value("u", "upper limit on selected binary parameter"),
];

const SCALE: &[OptionSpec] = &[
    OptionSpec::flag("c", "zero the center of mass position and velocity"),
    OptionSpec::flag("d", "debug mode"),
    OptionSpec::value("e", "specify softening parameter"),
    OptionSpec::value("E", "specify total energy"),
    OptionSpec::value("m", "specify total mass"),
    OptionSpec::value("q", "specify virial ratio"),
    OptionSpec::value("r", "specify virial radius"),
    OptionSpec::flag("s", "scale to \"standard\" units (-m 1 -r 1 -q 0.5)"),
];

const KIRA: &[OptionSpec] = &[
    OptionSpec::value("a", "specify accuracy parameter"),
    OptionSpec::value("b", "specify frequency of full binary output"),
    OptionSpec::flag("B", "turn on binary evolution"),
    OptionSpec::value("c", "include comment"),
    OptionSpec::value("d", "specify log output interval"),
    OptionSpec::value("D", "specify snapshot interval"),
    OptionSpec::value("e", "specify softening length"),
    OptionSpec::value("f", "turn on/off internal dynamical friction on stars"),
    OptionSpec::value("G", "specify initial stripping radius"),
    OptionSpec::value("h", "specify stellar-evolution time step"),
    OptionSpec::value("I", "specify (re)initialization timescale"),
    OptionSpec::value("l", "specify close-encounter distance"),
    OptionSpec::value("L", "specify CPU time limit, in seconds"),
    OptionSpec::value("n", "stop at specified number of particles"),
    OptionSpec::flag("o", "prevent kira from overriding some settings based on input snapshot data"),
    OptionSpec::flag("O", "save (and overwrite) extra snapshot at each output"),
    OptionSpec::value("q", "specify initial virial ratio"),
    OptionSpec::value("r", "specify initial virial radius"),
    OptionSpec::seed("s"),
    OptionSpec::flag("S", "turn on stellar evolution"),
    OptionSpec::required_or("t", "specify time span of calculation", "10"),
    OptionSpec::flag("u", "enable/disable unperturbed multiples"),
    OptionSpec::flag("U", "toggle all unperturbed motion"),
    OptionSpec::flag("v", "toggle \"verbose\" mode"),
    OptionSpec::value("W", "specify full-dump (worldline) timescale"),
    OptionSpec::flag("x", "toggle output of extended-precision time"),
    OptionSpec::value("X", "specify escaper removal timescale"),
    OptionSpec::value("z", "specify stellar merger criterion"),
];

pub(crate) static STANDARD: &[StageSchema] = &[
    StageSchema {
        name: "makeking",
        summary: "Construct a King model",
        options: MAKEKING,
    },
    StageSchema {
        name: "makeplummer",
        summary: "Construct a Plummer model with a spatial or mass cut-off",
        options: MAKEPLUMMER,
    },
    StageSchema {
        name: "makesphere",
        summary: "Construct a simple homogeneous sphere",
        options: MAKESPHERE,
    },
    StageSchema {
        name: "makecube",
        summary: "Construct a simple homogeneous cube",
        options: MAKECUBE,
    },
    StageSchema {
        name: "makemass",
        summary: "Add a mass spectrum to an input snapshot",
        options: MAKEMASS,
    },
    StageSchema {
        name: "makesecondary",
        summary: "Create binary secondary components for randomly selected stars",
        options: MAKESECONDARY,
    },
    StageSchema {
        name: "makebinary",
        summary: "Add binary orbits to an existing binary tree",
        options: MAKEBINARY,
    },
    StageSchema {
        name: "scale",
        summary: "(Re)scale an N-body system to specified M, Q (=T/U), and E",
        options: SCALE,
    },
    StageSchema {
        name: "kira",
        summary: "Hermite N-body integrator with evolving hierarchical tree structure",
        options: KIRA,
    },
];
