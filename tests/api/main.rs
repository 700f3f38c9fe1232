// one test binary for the whole api suite: linking is sequential, so a single
// executable keeps CI build times down
mod cors;
mod methods;
