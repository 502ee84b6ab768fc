/*!

This is the long-form manual for `slot_voting` and `termpoll`.

## The poll grid

A poll is a fixed grid of slots: the Cartesian product of an ordered list of
days and an ordered list of times. A slot identifier is the day label
followed by a space and the time label, e.g. `Mo 10.02. 16:30`. The grid is
described once, at startup, and never changes while a poll is open.

## Scoring

Each participant partitions the slots they care about into *primary*
(first choice) and *secondary* (acceptable fallback) selections. The score
of a slot is `2 × primary + 1 × secondary`, summed over all participants.

Notes:
- a slot that appears in both lists of the same vote is counted in both.
  This is surprising but deliberate: the tally reports exactly what was
  submitted and does not repair malformed input.
- selections that match no grid slot are skipped by the tally. They are
  still stored, so a grid change can bring them back.

## Ranking

Slots are ordered by descending score. Ranks are *dense*: slots with equal
scores share a rank number, and the next distinct lower score gets the
previous rank plus one. Slots with a zero score are not part of the ranking,
although their (zeroed) statistics are part of the full per-slot output.
The relative order of slots with equal scores is not specified.

## Configuration

`termpoll` reads an optional JSON poll description (`--config`):

| key            | meaning                                             |
|----------------|-----------------------------------------------------|
| `title`        | poll title, echoed in summaries                     |
| `description`  | optional free text                                  |
| `adminSecret`  | optional shared secret gating the admin view        |
| `days`         | list of `{"label", "short"}` objects, in grid order |
| `times`        | list of time labels, in grid order                  |
| `databasePath` | optional path of the vote database                  |

When no config file is given, the built-in default poll is used.

## Storage

Votes are persisted in a single SQLite table, one row per participant name
(unique, case-insensitive). Re-submitting under an existing name overwrites
the row in place: the update timestamp is refreshed, the creation timestamp
is preserved, and there is no history of previous selections. Concurrent
submissions under the same name are resolved by whichever write commits
last. The selection lists are stored as JSON arrays; a stored list that can
no longer be parsed is treated as empty rather than failing the poll.

*/
